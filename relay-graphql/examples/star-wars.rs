//! A Relay-style schema over an in-memory Star Wars data set.
//!
//! Two factions, each with a paginated connection to its ships. The example executes a
//! paginated query against the synthesized connection machinery, then re-fetches a
//! ship generically by its global id.

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, Object, Schema, TypeRef};
use async_trait::async_trait;
use relay_graphql::{init_logging, prelude::*};
use serde_json::json;
use std::sync::Arc;

////////////////////////////////////////////////////////////////////////////////////////////////////
// Schema
//

/// Factions of the galactic civil war.
struct Faction {
    data: Arc<Vec<Item>>,
}

#[async_trait]
impl RelayType for Faction {
    fn name(&self) -> &str {
        "Faction"
    }

    fn fields(&self) -> Vec<Field> {
        vec![item_field("name", TypeRef::named_nn(TypeRef::STRING))]
    }

    fn connections(&self) -> Vec<(String, ConnectionSpec)> {
        vec![("ships".into(), ConnectionSpec::new("Ship"))]
    }

    /// A missing faction is a null result.
    async fn resolve_by_id(&self, raw_id: &str) -> Result<Option<Item>, Error> {
        Ok(self
            .data
            .iter()
            .find(|faction| faction["id"] == raw_id)
            .cloned())
    }
}

/// Ships of either fleet.
struct Ship {
    data: Arc<Vec<Item>>,
}

#[async_trait]
impl RelayType for Ship {
    fn name(&self) -> &str {
        "Ship"
    }

    fn fields(&self) -> Vec<Field> {
        vec![item_field("name", TypeRef::named_nn(TypeRef::STRING))]
    }

    /// A missing ship is a hard error.
    async fn resolve_by_id(&self, raw_id: &str) -> Result<Option<Item>, Error> {
        match self.data.iter().find(|ship| ship["id"] == raw_id) {
            Some(ship) => Ok(Some(ship.clone())),
            None => Err(Error::NotFound {
                ty: "Ship".into(),
                id: raw_id.into(),
            }),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Test data
//

fn rebel_ships() -> Vec<Item> {
    [
        ("1", "X-Wing"),
        ("2", "Y-Wing"),
        ("3", "A-Wing"),
        ("4", "Millennium Falcon"),
        ("5", "Home One"),
    ]
    .into_iter()
    .map(|(id, name)| json!({ "id": id, "name": name }))
    .collect()
}

fn imperial_ships() -> Vec<Item> {
    [("6", "TIE Fighter"), ("7", "TIE Interceptor"), ("8", "Executor")]
        .into_iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect()
}

fn factions() -> Vec<Item> {
    vec![
        json!({
            "id": "1",
            "name": "Alliance to Restore the Republic",
            "ships": rebel_ships(),
        }),
        json!({
            "id": "2",
            "name": "Galactic Empire",
            "ships": imperial_ships(),
        }),
    ]
}

fn schema() -> Schema {
    let factions = Arc::new(factions());
    let ships = Arc::new(
        rebel_ships()
            .into_iter()
            .chain(imperial_ships())
            .collect::<Vec<_>>(),
    );

    let mut registry = TypeRegistry::new();
    registry.register(Arc::new(Faction {
        data: Arc::clone(&factions),
    }));
    registry.register(Arc::new(Ship { data: ships }));

    let rebels = factions[0].clone();
    let empire = factions[1].clone();
    let query = Object::new("Query")
        .field(registry.node_field())
        .field(registry.nodes_field())
        .field(Field::new(
            "rebels",
            TypeRef::named("Faction"),
            move |_ctx| {
                let rebels = rebels.clone();
                FieldFuture::new(async move { Ok(Some(FieldValue::owned_any(rebels))) })
            },
        ))
        .field(Field::new(
            "empire",
            TypeRef::named("Faction"),
            move |_ctx| {
                let empire = empire.clone();
                FieldFuture::new(async move { Ok(Some(FieldValue::owned_any(empire))) })
            },
        ));

    registry
        .apply(Schema::build("Query", None, None))
        .register(query)
        .finish()
        .unwrap()
}

#[async_std::main]
async fn main() {
    init_logging();
    let schema = schema();

    // The first page of the rebel fleet, with cursors and page boundaries.
    let response = schema
        .execute(
            r#"query {
                rebels {
                    name
                    ships(first: 2) {
                        totalCount
                        edges { node { id name } cursor }
                        pageInfo { hasNextPage endCursor }
                    }
                }
            }"#,
        )
        .await;
    println!("{}", serde_json::to_string_pretty(&response.data).unwrap());

    // Generic re-fetch of a ship by its global id.
    let id = global_id::encode("ship", "4");
    let response = schema
        .execute(format!(
            r#"query {{ node(id: "{id}") {{ ... on Ship {{ name }} }} }}"#
        ))
        .await;
    println!("{}", serde_json::to_string_pretty(&response.data).unwrap());
}
