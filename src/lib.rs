pub mod app_config;
pub mod db;
pub mod hashtags;
pub mod links;
pub mod media;
pub mod orm;
pub mod preview;
pub mod search;
pub mod storage;
pub mod trending;
pub mod tweets;
pub mod web;
