//! # Applicators
//!
//! Create-or-merge of a desired object against the store. Two strategies
//! share the [`Applicator`] contract but not their conflict semantics:
//!
//! - [`PatchingApplicator`] merge-patches the declared fields of the desired
//!   object; fields it does not declare are never touched, and fields it does
//!   declare are last-write-wins
//! - [`UpdatingApplicator`] replaces the whole object carrying the resource
//!   version it read, so a concurrent write surfaces as a conflict
//!
//! Neither retries. On the create path no [`ApplyOption`] runs, since there
//! is nothing to compare against.

mod options;
mod patching;
mod updating;

pub use options::{connection_secret_must_be_controllable_by, must_be_controllable_by};
pub use patching::PatchingApplicator;
pub use updating::UpdatingApplicator;

use crate::error::Result;
use crate::resource::StoredObject;
use async_trait::async_trait;
use std::fmt;

const ERR_GET_OBJECT: &str = "cannot get object";
const ERR_CREATE_OBJECT: &str = "cannot create object";
const ERR_PATCH_OBJECT: &str = "cannot patch object";
const ERR_UPDATE_OBJECT: &str = "cannot update object";

type OptionFn<K> = dyn Fn(&K, &mut K) -> Result<()> + Send + Sync;

/// Precondition or adjustment run before an applicator writes an existing object
///
/// Receives the object currently stored and the desired object. Returning an
/// error vetoes the write; mutating the desired object changes what is written.
pub struct ApplyOption<K> {
    name: &'static str,
    check: Box<OptionFn<K>>,
}

impl<K> ApplyOption<K> {
    pub fn new<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(&K, &mut K) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name,
            check: Box::new(check),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// # Errors
    ///
    /// Returns whatever the option returns to veto the write.
    pub fn check(&self, current: &K, desired: &mut K) -> Result<()> {
        (self.check)(current, desired)
    }
}

impl<K> fmt::Debug for ApplyOption<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplyOption")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Run options in order, stopping at the first veto
fn run_options<K>(options: &[ApplyOption<K>], current: &K, desired: &mut K) -> Result<()> {
    options
        .iter()
        .try_for_each(|option| option.check(current, desired))
}

/// Applies changes to an object, creating it when it does not exist
#[async_trait]
pub trait Applicator: Send + Sync {
    /// Create `obj` when absent, otherwise merge it into the stored object
    ///
    /// On success `obj` holds the object as stored after the write.
    async fn apply<K: StoredObject>(&self, obj: &mut K, options: &[ApplyOption<K>]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_options_run_in_order_and_stop_at_first_veto() {
        let seen = Arc::new(AtomicUsize::new(0));
        let after_veto = Arc::clone(&seen);
        let options: Vec<ApplyOption<String>> = vec![
            ApplyOption::new("append", |_current: &String, desired: &mut String| {
                desired.push_str("-checked");
                Ok(())
            }),
            ApplyOption::new("veto", |_current: &String, _desired: &mut String| {
                Err(Error::OptionVeto("not today".to_string()))
            }),
            ApplyOption::new("unreached", move |_current: &String, _desired: &mut String| {
                after_veto.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        ];

        let mut desired = "db".to_string();
        let err = run_options(&options, &"db".to_string(), &mut desired).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OptionVeto);
        assert_eq!(desired, "db-checked");
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(options[1].name(), "veto");
    }
}
