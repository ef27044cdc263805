use std::{
    fmt,
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::Path,
    time::Duration,
};

const CONNECT_TIMEOUT_SECS: u64 = 30;

const READ_TIMEOUT_SECS: u64 = 300;

#[derive(Debug)]
pub enum FetchError {
    Network(String),
    Io(io::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(message) => write!(f, "download failed: {}", message),
            Self::Io(error) => write!(f, "cannot store model: {}", error),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<io::Error> for FetchError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

/// Download `url` to `path` unless the file is already there.
///
/// Returns whether anything was downloaded.
pub fn ensure_model(path: &Path, url: &str) -> Result<bool, FetchError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    log::info!("downloading {} to {}", url, path.display());
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(CONNECT_TIMEOUT_SECS)))
        .timeout_recv_body(Some(Duration::from_secs(READ_TIMEOUT_SECS)))
        .build();
    let agent = ureq::Agent::new_with_config(config);
    let response = agent
        .get(url)
        .call()
        .map_err(|error| FetchError::Network(format!("{}: {}", url, error)))?;

    let bytes = install_download(response.into_body().into_reader(), path)?;
    log::info!("downloaded {} bytes to {}", bytes, path.display());
    Ok(true)
}

/// Stream `reader` into a `.part` file next to `dest`, then move it into place.
///
/// A failed transfer leaves neither file behind.
pub fn install_download(mut reader: impl Read, dest: &Path) -> io::Result<u64> {
    let part = dest.with_extension("part");
    let written = File::create(&part).and_then(|file| {
        let mut writer = BufWriter::new(file);
        let bytes = io::copy(&mut reader, &mut writer)?;
        writer.flush()?;
        Ok(bytes)
    });
    match written.and_then(|bytes| fs::rename(&part, dest).map(|_| bytes)) {
        Ok(bytes) => Ok(bytes),
        Err(error) => {
            let _ = fs::remove_file(&part);
            Err(error)
        }
    }
}
