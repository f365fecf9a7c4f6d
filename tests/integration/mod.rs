mod sandbox_pipeline_tests;
