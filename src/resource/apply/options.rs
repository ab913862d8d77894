//! # Ownership Apply Options
//!
//! Options refusing to write over objects controlled by someone else.

use super::ApplyOption;
use crate::constants::SECRET_TYPE_CONNECTION;
use crate::error::Error;
use crate::meta;
use crate::resource::StoredObject;
use k8s_openapi::api::core::v1::Secret;

/// Require that an existing object is uncontrolled or controlled by `uid`
pub fn must_be_controllable_by<K: StoredObject>(uid: impl Into<String>) -> ApplyOption<K> {
    let uid = uid.into();
    ApplyOption::new("must-be-controllable-by", move |current: &K, _desired: &mut K| {
        match meta::controller_of(current) {
            Some(controller) if controller.uid != uid => Err(Error::OwnershipViolation(format!(
                "existing object is not controlled by UID {uid:?}"
            ))),
            _ => Ok(()),
        }
    })
}

/// Require that an existing secret may be taken over by the owner with `uid`
///
/// An existing secret controlled by another UID is refused. An existing
/// secret with no controller is only accepted when it is a connection
/// secret; any other uncontrolled secret belongs to someone else.
pub fn connection_secret_must_be_controllable_by(uid: impl Into<String>) -> ApplyOption<Secret> {
    let uid = uid.into();
    ApplyOption::new(
        "connection-secret-must-be-controllable-by",
        move |current: &Secret, _desired: &mut Secret| match meta::controller_of(current) {
            None if current.type_.as_deref() != Some(SECRET_TYPE_CONNECTION) => {
                Err(Error::OwnershipViolation(format!(
                    "refusing to modify uncontrolled secret of type {:?}",
                    current.type_.as_deref().unwrap_or_default()
                )))
            }
            Some(controller) if controller.uid != uid => Err(Error::OwnershipViolation(format!(
                "existing secret is not controlled by UID {uid:?}"
            ))),
            _ => Ok(()),
        },
    )
}
