use sprig::application;
use sprig::runner::{ApplicationRunner, ErrorPtr};
use sprig_di::instance::Autowired;
use sprig_di::{Application, Component};

// marks the root of the component scan; everything in this module will be discovered
#[derive(Application)]
struct App;

#[derive(Component, Default)]
#[component(stereotype = "service")]
struct Greeting;

impl Greeting {
    fn text(&self) -> &'static str {
        "Hello world!"
    }
}

// this is an application runner, which will run when the application starts; the container
// discovers it through the listed interface
#[derive(Component, Default)]
#[component(interfaces = ["ApplicationRunner"])]
struct HelloWorldRunner {
    #[autowired]
    greeting: Autowired<Greeting>,
}

impl ApplicationRunner for HelloWorldRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        if let Some(greeting) = self.greeting.get() {
            println!("{}", greeting.text());
        }
        Ok(())
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // create our application, which will detect all runners
    let application = application::create::<App>().expect("unable to create application");

    // prints "Hello world!"
    application.run().expect("error running application");
}
