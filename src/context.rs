use serde::{Deserialize, Serialize};

use crate::users::User;

/// Service method being invoked, as named by the surrounding framework.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
}

impl Method {
    /// `find` is the listing method; everything else targets a single record.
    pub fn is_listing(self) -> bool {
        self == Method::Find
    }
}

/// Request context passed explicitly into every resolution call.
///
/// `user` is the authenticated actor's resolved record, if any. Requests
/// with no actor are left unrestricted here; rejecting them is the outer
/// authorization layer's call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: Option<User>,
    pub method: Method,
}

impl RequestContext {
    pub fn new(user: Option<User>, method: Method) -> Self {
        Self { user, method }
    }

    /// Context with no authenticated actor.
    pub fn anonymous(method: Method) -> Self {
        Self { user: None, method }
    }
}
