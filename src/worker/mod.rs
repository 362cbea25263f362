pub mod refresh_worker;
