// Adapters layer: concrete clients for external systems. The triage backend
// (auth token + JSON over HTTP) lives here; local file storage stays under
// config alongside the CLI that owns its paths.

pub mod backend;
