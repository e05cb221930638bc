pub mod export_tests;
