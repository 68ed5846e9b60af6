use hiro_system_kit::Logger;

#[derive(Clone)]
pub struct Context {
    pub logger: Option<Logger>,
}

impl Context {
    pub fn empty() -> Context {
        Context { logger: None }
    }

    pub fn new(logger: Logger) -> Context {
        Context { logger: Some(logger) }
    }

    pub fn try_log<F>(&self, closure: F)
    where
        F: FnOnce(&Logger),
    {
        if let Some(ref logger) = self.logger {
            closure(logger)
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").field("logger", &self.logger.is_some()).finish()
    }
}
