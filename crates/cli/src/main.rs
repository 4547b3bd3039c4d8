mod commands;

use commands::{CommandLine, Commands, assemble, dimensions, reconcile, transition};
use courier_observability::LogFormat;
use courier_orders::OrderSettings;

fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    if commands.pretty {
        courier_observability::tracing::init(LogFormat::Pretty);
    } else {
        courier_observability::init();
    }

    let settings = OrderSettings::from_env();

    match commands.command {
        Commands::Assemble { request, pickup } => assemble::assemble(&request, &pickup, settings),
        Commands::Reconcile { order_id, request } => reconcile::reconcile(order_id, &request),
        Commands::Transition {
            order,
            status,
            description,
        } => transition::transition(&order, status, &description, settings),
        Commands::Dimensions(command) => dimensions::dimensions(command),
    }
}
