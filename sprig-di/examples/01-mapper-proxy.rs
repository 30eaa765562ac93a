use sprig_di::container::Container;
use sprig_di::error::MapperInvocationError;
use sprig_di::instance::Autowired;
use sprig_di::method_target;
use sprig_di::proxy::{Argument, MethodTargetResult};
use sprig_di::{mapper, Application, Component};
use tracing_subscriber::EnvFilter;

#[derive(Application)]
struct App;

// mappers have no hand-written implementation - every bound method is dispatched to a registered
// method target with the static parameters declared by the binding
#[mapper]
trait UserMapper {
    #[bind(class = "UserDao", method = "select_by_id", param_types = ["u64"], param_values = ["42"])]
    fn find_by_id(&self) -> Result<String, MapperInvocationError>;

    // calling an unbound method results in an UnboundMethod error
    fn delete_all(&self) -> Result<(), MapperInvocationError>;
}

struct UserDao;

impl UserDao {
    fn select_by_id(&self, id: u64) -> String {
        format!("user #{id}")
    }
}

fn select_by_id(arguments: &[Argument]) -> MethodTargetResult {
    let id = arguments
        .first()
        .ok_or(MapperInvocationError::InvalidArgument {
            index: 0,
            type_name: "u64".to_string(),
            reason: "missing argument".to_string(),
        })?
        .parse()?;

    Ok(Box::new(UserDao.select_by_id(id)))
}

method_target!(UserDao::select_by_id => select_by_id);

#[derive(Component, Default)]
struct UserController {
    #[autowired]
    mapper: Autowired<dyn UserMapper + Send + Sync>,
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // bootstrap diagnostics are logged with tracing, e.g. RUST_LOG=sprig_di=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let container = Container::init::<App>().expect("error initializing container");
    let controller = container
        .typed_bean::<UserController>()
        .expect("missing controller");
    let mapper = controller.mapper.get().expect("missing mapper");

    // prints "user #42"
    println!("{}", mapper.find_by_id().expect("error calling mapper"));

    // prints the unbound method error
    if let Err(error) = mapper.delete_all() {
        println!("{error}");
    }
}
