// HTTP clients for the external services behind the domain ports.
pub mod gemini;
pub mod places;
