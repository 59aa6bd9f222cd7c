//! Models module.
//!
//! Both models are consumed pre-built: `latent_factor` holds the
//! collaborative model, `content` the product similarity index and the
//! content-based estimate derived from it.
pub mod content;
pub mod latent_factor;
