use super::*;

pub(super) mod actions;
pub(super) mod ceremony;
pub(super) mod profiles;
pub(super) mod query;
