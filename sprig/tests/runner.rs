mod runner_test {
    use sprig::application::{create_with_config, RunnerProvider};
    use sprig::config::ApplicationConfig;
    use sprig::runner::{ApplicationRunner, ErrorPtr};
    use sprig_di::{Application, Component};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static RUNS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Application)]
    struct App;

    #[derive(Component, Default)]
    #[component(interfaces = ["ApplicationRunner"])]
    struct FirstRunner;

    impl ApplicationRunner for FirstRunner {
        fn run(&self) -> Result<(), ErrorPtr> {
            RUNS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn priority(&self) -> i8 {
            10
        }
    }

    #[derive(Component, Default)]
    #[component(stereotype = "service", interfaces = ["ApplicationRunner"])]
    struct SecondRunner;

    impl ApplicationRunner for SecondRunner {
        fn run(&self) -> Result<(), ErrorPtr> {
            RUNS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn should_discover_and_run_runners() {
        let application =
            create_with_config::<App>(&ApplicationConfig::default()).unwrap();

        let runners = application.provider().runners();
        assert_eq!(runners.len(), 2);
        assert!(runners.iter().any(|runner| runner.priority() == 10));

        application.run().unwrap();
        assert_eq!(RUNS.load(Ordering::SeqCst), 2);
    }
}
