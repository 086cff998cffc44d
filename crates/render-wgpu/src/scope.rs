use umbra_render::RenderError;

/// Run `create` inside validation and out-of-memory error scopes and turn
/// any captured error into [`RenderError::ResourceCreation`].
///
/// wgpu reports most creation failures asynchronously through the device
/// error handler; the scopes make them synchronous so startup can fail
/// cleanly instead of panicking in the uncaptured-error callback.
pub(crate) fn capture<T>(
    device: &wgpu::Device,
    resource: &'static str,
    create: impl FnOnce() -> T,
) -> Result<T, RenderError> {
    let value = scoped(device, create).map_err(|message| RenderError::ResourceCreation {
        resource,
        message,
    })?;
    Ok(value)
}

/// Like [`capture`] for shader modules.
pub(crate) fn capture_shader(
    device: &wgpu::Device,
    name: &'static str,
    source: &str,
) -> Result<wgpu::ShaderModule, RenderError> {
    scoped(device, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    })
    .map_err(|message| RenderError::Shader { name, message })
}

fn scoped<T>(device: &wgpu::Device, create: impl FnOnce() -> T) -> Result<T, String> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());
    match validation.or(out_of_memory) {
        Some(error) => Err(error.to_string()),
        None => Ok(value),
    }
}
