//! ferre: hardware store catalog and proforma client
//!
//! A command-line client for the store's REST backend. Products are
//! listed, created, edited and deleted through paginated views backed by a
//! keyed query cache; proformas (sales quotations) are assembled from
//! catalog products and exported as PDF or HTML.

pub mod cli;
pub mod core;
pub mod entities;
pub mod services;
pub mod view;
