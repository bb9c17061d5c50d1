pub mod advice;
pub mod api;
pub mod auth;
pub mod cache;
pub mod climate;
pub mod config;
pub mod db;
pub mod history;
pub mod model;
pub mod poller;
pub mod sources;
pub mod watering;
