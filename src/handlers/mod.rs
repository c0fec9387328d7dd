//! HTTP handlers for resource routes.

pub mod resource;
pub use resource::*;
