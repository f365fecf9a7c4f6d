mod analyst_pipeline_tests;
