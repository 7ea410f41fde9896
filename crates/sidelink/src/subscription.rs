//! Unsubscribe guards for notification handlers

use std::sync::Weak;

use crate::client::LinkInner;

/// Handle to one registered notification handler
///
/// Returned by [`SidecarLink::subscribe`](crate::SidecarLink::subscribe).
/// Removes exactly the handler it was issued for - other subscribers of the
/// same method are untouched. Removal happens on [`unsubscribe`] or when the
/// guard is dropped, whichever comes first; both are safe to repeat.
///
/// The guard holds only a weak reference, so keeping it around after the
/// link is gone is harmless.
///
/// [`unsubscribe`]: Subscription::unsubscribe
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    link: Weak<LinkInner>,
    method: String,
    token: u64,
}

impl Subscription {
    pub(crate) fn new(link: Weak<LinkInner>, method: String, token: u64) -> Self {
        Self {
            link,
            method,
            token,
        }
    }

    /// The method name this handler was registered under
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Remove the handler now
    ///
    /// Idempotent: calling this more than once (or letting the guard drop
    /// afterwards) is a no-op after the first removal.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.link.upgrade() {
            inner.router.unsubscribe(&self.method, self.token);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("method", &self.method)
            .field("token", &self.token)
            .finish()
    }
}
