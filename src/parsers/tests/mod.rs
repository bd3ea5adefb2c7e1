mod datetime_tests;
