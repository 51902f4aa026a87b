use std::{cell::RefCell, rc::Rc};

use cinder_resources::{
    MemoryDevice, ResourceConfig, ResourceManager, ScriptContext, ScriptError, ScriptRuntime,
    ScriptRuntimeFactory,
};

/// Runtime for `.lua` files that records what it loads.
///
/// Reference `1` echoes its arguments prefixed with the calling resource's
/// name, reference `2` fails.
#[derive(Default)]
pub struct TestRuntime {
    loaded: RefCell<Vec<String>>,
}

impl TestRuntime {
    pub fn loaded(&self) -> Vec<String> {
        self.loaded.borrow().clone()
    }
}

impl ScriptRuntime for TestRuntime {
    fn name(&self) -> &str {
        "lua"
    }

    fn handles_file(&self, file_name: &str, _contents: &[u8]) -> bool {
        file_name.ends_with(".lua")
    }

    fn create(&self, _ctx: &ScriptContext) -> Result<(), ScriptError> {
        Ok(())
    }

    fn load_file(
        &self,
        ctx: &ScriptContext,
        file_name: &str,
        contents: &[u8],
    ) -> Result<(), ScriptError> {
        if contents.starts_with(b"error") {
            return Err(ScriptError::runtime(format!("{} failed to load", file_name)));
        }
        self.loaded
            .borrow_mut()
            .push(format!("{}/{}", ctx.resource_name(), file_name));
        Ok(())
    }

    fn call_ref(
        &self,
        ctx: &ScriptContext,
        reference: u32,
        args: &[u8],
    ) -> Result<Vec<u8>, ScriptError> {
        match reference {
            1 => {
                let mut result = format!("{}:", ctx.resource_name()).into_bytes();
                result.extend_from_slice(args);
                Ok(result)
            }
            2 => Err(ScriptError::runtime("reference 2 always fails")),
            reference => Err(ScriptError::UnknownReference { reference }),
        }
    }
}

/// Hands out [`TestRuntime`]s and keeps them around for inspection.
#[derive(Clone, Default)]
pub struct TestRuntimeFactory {
    created: Rc<RefCell<Vec<Rc<TestRuntime>>>>,
}

impl TestRuntimeFactory {
    /// Every file loaded by any runtime this factory created.
    pub fn loaded(&self) -> Vec<String> {
        self.created
            .borrow()
            .iter()
            .flat_map(|runtime| runtime.loaded())
            .collect()
    }
}

impl ScriptRuntimeFactory for TestRuntimeFactory {
    fn name(&self) -> &str {
        "lua"
    }

    fn create_runtime(&self) -> Rc<dyn ScriptRuntime> {
        let runtime = Rc::new(TestRuntime::default());
        self.created.borrow_mut().push(runtime.clone());
        runtime
    }
}

/// A manager over an in-memory device holding one resource per entry, each
/// with a `main.lua` server script and the given extra manifest lines. Every
/// resource is scanned; none is started.
pub fn test_manager(
    resources: &[(&str, &str)],
) -> (ResourceManager, TestRuntimeFactory) {
    let device = MemoryDevice::new();
    for (name, extra_manifest) in resources {
        device.insert(
            &format!("resources/{}/fxmanifest", name),
            format!("server_script 'main.lua'\n{}", extra_manifest),
        );
        device.insert(&format!("resources/{}/main.lua", name), "");
    }

    let factory = TestRuntimeFactory::default();
    let manager = ResourceManager::new(ResourceConfig::default(), device);
    manager.register_runtime(factory.clone());
    if let Err(error) = manager.scan_resources("resources") {
        log::warn!("Scanning test resources failed: {}", error);
    }
    (manager, factory)
}
