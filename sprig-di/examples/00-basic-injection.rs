use sprig_di::container::Container;
use sprig_di::instance::{Autowired, Value};
use sprig_di::{injectable, Application, Component};
use tracing_subscriber::EnvFilter;

// marks the application entry point - all components in this module are discovered
#[derive(Application)]
struct App;

// a trait which can be injected in place of its implementation
#[injectable]
trait Greeter {
    fn greet(&self, name: &str) -> String;
}

// services are additionally registered under their first interface
#[derive(Component, Default)]
#[component(stereotype = "service", interfaces = ["Greeter"])]
struct EnglishGreeter {
    // assigned from the SPRIG_PROPERTY_GREETING environment variable, if present
    #[value("greeting")]
    greeting: Value<String>,
}

impl Greeter for EnglishGreeter {
    fn greet(&self, name: &str) -> String {
        let greeting = self.greeting.get().map(String::as_str).unwrap_or("Hello");
        format!("{greeting}, {name}!")
    }
}

#[derive(Component, Default)]
#[component(stereotype = "controller", alias = "welcome")]
struct WelcomeController {
    // interface dependencies are resolved after all components are created
    #[autowired]
    greeter: Autowired<dyn Greeter + Send + Sync>,
}

impl WelcomeController {
    fn welcome(&self, name: &str) -> String {
        self.greeter
            .get()
            .map(|greeter| greeter.greet(name))
            .unwrap_or_default()
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // bootstrap diagnostics are logged with tracing, e.g. RUST_LOG=sprig_di=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let container = Container::init::<App>().expect("error initializing container");

    let controller = container
        .named_bean::<WelcomeController>("welcome")
        .expect("missing controller");

    // prints "Hello, world!"
    println!("{}", controller.welcome("world"));
}
