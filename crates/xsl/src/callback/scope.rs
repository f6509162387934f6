use super::{CallbackRegistry, CallbackValue};
use crate::error::XslError;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

thread_local! {
    static ACTIVE: RefCell<Option<Arc<CallbackRegistry>>> = const { RefCell::new(None) };
}

/// Keeps a registry active for native callbacks on the current thread.
///
/// Dropping the scope restores whatever was active before it, so scopes nest
/// and are released on early returns and panics alike.
#[must_use = "the registry is deactivated as soon as the scope is dropped"]
pub struct CallbackScope {
    previous: Option<Arc<CallbackRegistry>>,
    // Tied to the thread whose slot it restores.
    _not_send: PhantomData<*const ()>,
}

impl CallbackScope {
    pub fn activate(registry: Arc<CallbackRegistry>) -> Self {
        let previous = ACTIVE.with(|active| active.replace(Some(registry)));
        log::trace!("Activated native callback scope");
        Self {
            previous,
            _not_send: PhantomData,
        }
    }
}

impl Drop for CallbackScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE.with(|active| *active.borrow_mut() = previous);
        log::trace!("Released native callback scope");
    }
}

/// Whether a registry is active on the current thread.
pub fn is_active() -> bool {
    ACTIVE.with(|active| active.borrow().is_some())
}

/// Entry point for the evaluator's `ext:call` hook.
pub fn dispatch(name: &str, args: &[CallbackValue]) -> Result<CallbackValue, XslError> {
    let registry = ACTIVE
        .with(|active| active.borrow().clone())
        .ok_or(XslError::NoActiveContext)?;
    registry.call(name, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_returning(value: &'static str) -> Arc<CallbackRegistry> {
        let mut registry = CallbackRegistry::new();
        registry.register("which", move |_: &[CallbackValue]| Ok(value.into()));
        Arc::new(registry)
    }

    #[test]
    fn test_dispatch_requires_active_scope() {
        assert!(!is_active());
        assert!(matches!(
            dispatch("which", &[]),
            Err(XslError::NoActiveContext)
        ));
    }

    #[test]
    fn test_nested_scopes_restore_previous() {
        let _outer = CallbackScope::activate(registry_returning("outer"));
        {
            let _inner = CallbackScope::activate(registry_returning("inner"));
            assert_eq!(dispatch("which", &[]).unwrap(), CallbackValue::from("inner"));
        }
        assert_eq!(dispatch("which", &[]).unwrap(), CallbackValue::from("outer"));
    }

    #[test]
    fn test_scope_released_on_panic() {
        let result = std::panic::catch_unwind(|| {
            let _scope = CallbackScope::activate(registry_returning("x"));
            panic!("evaluator failure");
        });
        assert!(result.is_err());
        assert!(!is_active());
    }

    #[test]
    fn test_scope_is_thread_local() {
        let _scope = CallbackScope::activate(registry_returning("main"));
        let other = std::thread::spawn(is_active).join().unwrap();
        assert!(!other);
        assert!(is_active());
    }
}
