pub mod prediction_service;
