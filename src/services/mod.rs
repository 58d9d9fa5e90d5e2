pub mod directory_service;
pub mod reconcile_service;
pub mod settings_service;
pub mod tag_service;
pub mod thumbnail_service;
