use {
    crate::{BackendError, Device, ModelSource, Runtime, Session},
    base::Tensor,
    ndarray::ArrayD,
    ort::{inputs, session::Session as OrtSession, value::TensorRef},
    std::collections::HashMap,
};

/// ONNX Runtime via `ort`.
pub struct OnnxRuntime {
    device: Device,
}

impl OnnxRuntime {
    pub fn new(device: Device) -> Self {
        Self { device }
    }
}

impl Runtime for OnnxRuntime {
    fn name(&self) -> &str {
        "onnx"
    }

    fn load_model(&self, model: &ModelSource) -> Result<Box<dyn Session>, BackendError> {
        let device = self.device;
        let mut builder = OrtSession::builder().map_err(|e| {
            BackendError::ModelUnavailable(format!("failed to create session builder: {}", e))
        })?;

        builder = match device {
            Device::Cpu => {
                log::info!("onnx: using CPU execution provider");
                builder
            }
            #[cfg(feature = "cuda")]
            Device::Cuda { device_id } => {
                use ort::ep::ExecutionProvider;
                use ort::execution_providers::CUDAExecutionProvider;
                let ep = CUDAExecutionProvider::default().with_device_id(device_id);
                let available = ep.is_available().unwrap_or(false);
                log::info!(
                    "onnx: CUDA EP requested (device_id={}), available: {}",
                    device_id,
                    available
                );
                builder.with_execution_providers([ep.build()]).map_err(|e| {
                    BackendError::ModelUnavailable(format!("{} unavailable: {}", device, e))
                })?
            }
            #[cfg(not(feature = "cuda"))]
            Device::Cuda { .. } => {
                return Err(BackendError::ModelUnavailable(format!(
                    "{} requested but built without the cuda feature",
                    device
                )));
            }
        };

        let session = match model {
            ModelSource::File(path) => builder.commit_from_file(path).map_err(|e| {
                BackendError::ModelUnavailable(format!(
                    "failed to load model from {}: {}",
                    path.display(),
                    e
                ))
            })?,
            ModelSource::Memory(bytes) => builder.commit_from_memory(bytes).map_err(|e| {
                BackendError::ModelUnavailable(format!("failed to load model from memory: {}", e))
            })?,
        };

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|input| input.name().to_string())
            .collect();
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|output| output.name().to_string())
            .collect();

        Ok(Box::new(OnnxSession {
            session,
            input_names,
            output_names,
        }))
    }
}

pub struct OnnxSession {
    session: OrtSession,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl Session for OnnxSession {
    fn run(
        &mut self,
        inputs: &[(&str, Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, BackendError> {
        // pose models take a single image input
        let [(name, tensor)] = inputs else {
            return Err(BackendError::Inference(format!(
                "expected exactly one input, got {}",
                inputs.len()
            )));
        };
        if !self.input_names.iter().any(|known| known == name) {
            return Err(BackendError::Inference(format!(
                "unknown input {:?}, model expects {:?}",
                name, self.input_names
            )));
        }

        let array = tensor_to_ndarray(tensor.clone())?;
        let tensor_ref = TensorRef::from_array_view(array.view()).map_err(|e| {
            BackendError::Inference(format!("failed to create tensor ref: {}", e))
        })?;
        let outputs = self
            .session
            .run(inputs![*name => tensor_ref])
            .map_err(|e| BackendError::Inference(format!("inference failed: {}", e)))?;

        let mut result = HashMap::new();
        for output_name in &self.output_names {
            let array = outputs[output_name.as_str()]
                .try_extract_array::<f32>()
                .map_err(|e| {
                    BackendError::Inference(format!("output '{}' is not f32: {}", output_name, e))
                })?;
            result.insert(output_name.clone(), ndarray_to_tensor(array)?);
        }

        Ok(result)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}

fn tensor_to_ndarray(tensor: Tensor<f32>) -> Result<ArrayD<f32>, BackendError> {
    ArrayD::from_shape_vec(tensor.shape, tensor.data).map_err(|e| {
        BackendError::Inference(format!("failed to create ndarray from tensor: {}", e))
    })
}

fn ndarray_to_tensor(
    array: ndarray::ArrayView<'_, f32, ndarray::IxDyn>,
) -> Result<Tensor<f32>, BackendError> {
    let shape = array.shape().to_vec();
    let data = array.iter().copied().collect();
    Ok(Tensor::new(shape, data)?)
}
