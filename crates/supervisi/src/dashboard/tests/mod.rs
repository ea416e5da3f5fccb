mod common;
mod live;
mod service;
