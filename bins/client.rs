use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use models::person::Timestamp;
use server::proto::{
    person::{PhoneNumber, PhoneType},
    phone_book_service_client::PhoneBookServiceClient,
    ListPersonRequest, Person, PersonIdRequest, PersonRequest,
};
use tonic::transport::Channel;
use tracing::debug;

/// Command line client for the phonebook gRPC service.
#[derive(Parser, Debug)]
#[command(name = "phonebook-client", version)]
struct Cli {
    /// Server endpoint
    #[arg(long, env = "PHONEBOOK_ENDPOINT", default_value = "http://localhost:50051")]
    endpoint: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a person; the server assigns the id
    Create(PersonArgs),
    /// Read a person by id
    Read { id: String },
    /// Replace every field of an existing person
    Update {
        id: String,
        #[command(flatten)]
        person: PersonArgs,
    },
    /// Delete a person by id
    Delete { id: String },
    /// Stream every person
    List,
}

#[derive(Args, Debug)]
struct PersonArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    /// NUMBER:TYPE where TYPE is mobile, home or work (repeatable, order is kept)
    #[arg(long = "phone", value_parser = parse_phone)]
    phones: Vec<PhoneNumber>,
}

impl PersonArgs {
    fn into_person(self, id: String) -> Person {
        Person { id, name: self.name, email: self.email, phones: self.phones, last_updated: None }
    }
}

fn parse_phone(raw: &str) -> Result<PhoneNumber, String> {
    let (number, kind) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NUMBER:TYPE, got {:?}", raw))?;
    let kind = match kind.to_ascii_lowercase().as_str() {
        "mobile" => PhoneType::Mobile,
        "home" => PhoneType::Home,
        "work" => PhoneType::Work,
        other => return Err(format!("unknown phone type {:?}", other)),
    };
    Ok(PhoneNumber { number: number.trim().to_string(), r#type: kind as i32 })
}

fn render(person: &Person) -> String {
    let phones: Vec<String> = person
        .phones
        .iter()
        .map(|p| format!("{} ({})", p.number, p.r#type().as_str_name()))
        .collect();
    let updated = person
        .last_updated
        .as_ref()
        .and_then(|ts| Timestamp { seconds: ts.seconds, nanos: ts.nanos }.to_datetime())
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "-".into());
    format!(
        "id={} name={:?} email={:?} phones=[{}] last_updated={}",
        person.id,
        person.name,
        person.email,
        phones.join(", "),
        updated
    )
}

fn status_error(op: &str, status: tonic::Status) -> anyhow::Error {
    anyhow!("{} failed: code = {:?} desc = {}", op, status.code(), status.message())
}

async fn execute(client: &mut PhoneBookServiceClient<Channel>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Create(args) => {
            let req = PersonRequest { person: Some(args.into_person(String::new())) };
            let res = client.create_person(req).await.map_err(|s| status_error("create", s))?;
            let person = res.into_inner().person.unwrap_or_default();
            println!("Person created: {}", render(&person));
        }
        Command::Read { id } => {
            let res = client
                .read_person(PersonIdRequest { person_id: id })
                .await
                .map_err(|s| status_error("read", s))?;
            println!("{}", render(&res.into_inner().person.unwrap_or_default()));
        }
        Command::Update { id, person } => {
            let req = PersonRequest { person: Some(person.into_person(id)) };
            let res = client.update_person(req).await.map_err(|s| status_error("update", s))?;
            println!("Person updated: {}", render(&res.into_inner().person.unwrap_or_default()));
        }
        Command::Delete { id } => {
            let res = client
                .delete_person(PersonIdRequest { person_id: id })
                .await
                .map_err(|s| status_error("delete", s))?;
            println!("Deleted: {}", res.into_inner().deleted);
        }
        Command::List => {
            let mut stream = client
                .list_person(ListPersonRequest {})
                .await
                .map_err(|s| status_error("list", s))?
                .into_inner();
            let mut count = 0usize;
            while let Some(res) = stream.message().await.map_err(|s| status_error("list stream", s))? {
                count += 1;
                println!("{}", render(&res.person.unwrap_or_default()));
            }
            debug!(count, "list stream finished");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_default();
    let Cli { endpoint, command } = Cli::parse();

    let result = async move {
        let mut client = PhoneBookServiceClient::connect(endpoint.clone())
            .await
            .with_context(|| format!("cannot connect to {}", endpoint))?;
        execute(&mut client, command).await
    }
    .await;

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::ExitCode::FAILURE
        }
    }
}
