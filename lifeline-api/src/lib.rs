// Lifeline API
//
// HTTP layer: routing, extractors, error rendering and the OpenAPI document.

pub mod api;
pub mod entities;
pub mod openapi;
