pub mod controller;
pub mod directory;
pub mod model;
pub mod service;
