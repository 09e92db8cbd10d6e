mod credentials_tests;
