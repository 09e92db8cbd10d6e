mod blacklist_tests;
