//! Request extractors whose rejections use the API error format.

pub mod json;
