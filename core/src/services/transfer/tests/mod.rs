mod lifespan_tests;
mod service_tests;
