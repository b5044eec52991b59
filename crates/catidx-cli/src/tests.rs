use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["catidx-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["catidx-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["catidx-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn attributes_defaults_to_store_zero() {
    let cli = Cli::try_parse_from(["catidx-cli", "attributes", "1", "2"]).unwrap();
    match cli.command {
        Some(Commands::Attributes { store, ids }) => {
            assert_eq!(store, 0);
            assert_eq!(ids, vec![1, 2]);
        }
        other => panic!("expected attributes command, got {other:?}"),
    }
}

#[test]
fn attributes_with_store() {
    let cli = Cli::try_parse_from(["catidx-cli", "attributes", "--store", "3", "42"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Attributes { store: 3, ref ids }) if ids == &[42]
    ));
}

#[test]
fn attributes_requires_ids() {
    assert!(Cli::try_parse_from(["catidx-cli", "attributes"]).is_err());
}

#[test]
fn attributes_rejects_non_numeric_ids() {
    assert!(Cli::try_parse_from(["catidx-cli", "attributes", "abc"]).is_err());
}

#[test]
fn inventory_children_flag() {
    let cli = Cli::try_parse_from(["catidx-cli", "inventory", "--children", "7"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Inventory { children: true, ref ids }) if ids == &[7]
    ));
}

#[test]
fn inventory_defaults_to_parent_columns() {
    let cli = Cli::try_parse_from(["catidx-cli", "inventory", "7", "8"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Inventory { children: false, .. })
    ));
}
