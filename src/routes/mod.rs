//! Route modules for the OCR upload server

pub mod check;
pub mod draft;
pub mod emails;
pub mod health;
pub mod upload;
