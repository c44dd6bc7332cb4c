#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use fleet_waybill::controllers::{OrderController, ResourceController};
use fleet_waybill::dto::order_dto::{CargoItemRequest, CreateOrderRequest};
use fleet_waybill::models::reference::{Contract, Customer, CustomerRoute, Location};
use fleet_waybill::models::resource::{Driver, Resource, ResourceDetails};
use fleet_waybill::repositories::InMemoryWaybillRepository;

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, hour, minute, 0).unwrap()
}

pub fn in_2025() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

/// Tenant sembrado: un cliente sin rutas, tres ubicaciones, recursos y dos conductores
pub struct Fixture {
    pub repo: Arc<InMemoryWaybillRepository>,
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub depot: Uuid,
    pub port: Uuid,
    pub quarry: Uuid,
    pub truck_v: Uuid,
    pub truck_w: Uuid,
    pub trailer: Uuid,
    pub tarp: Uuid,
    pub driver_1: Uuid,
    pub driver_2: Uuid,
}

impl Fixture {
    pub async fn new() -> Self {
        let repo = Arc::new(InMemoryWaybillRepository::new());
        let tenant_id = Uuid::new_v4();

        let customer_id = Uuid::new_v4();
        repo.add_customer(Customer {
            id: customer_id,
            tenant_id,
            name: "Harbour Cement".to_string(),
        })
        .await;

        let depot = add_location(&repo, tenant_id, "Depot").await;
        let port = add_location(&repo, tenant_id, "Port").await;
        let quarry = add_location(&repo, tenant_id, "Quarry").await;

        let truck_v = add_resource(&repo, tenant_id, "Truck V", vehicle("CA 123-456")).await;
        let truck_w = add_resource(&repo, tenant_id, "Truck W", vehicle("CA 654-321")).await;
        let trailer = add_resource(
            &repo,
            tenant_id,
            "Flatbed",
            ResourceDetails::Attachment {
                registration: "TR 001".to_string(),
                attachment_type: Some("flatbed".to_string()),
            },
        )
        .await;
        let tarp = add_resource(
            &repo,
            tenant_id,
            "Tarpaulin",
            ResourceDetails::Accessory {
                serial_number: Some("TP-9".to_string()),
            },
        )
        .await;

        let driver_1 = add_driver(&repo, tenant_id, "Alex Mokoena").await;
        let driver_2 = add_driver(&repo, tenant_id, "Sam Naidoo").await;

        Self {
            repo,
            tenant_id,
            customer_id,
            depot,
            port,
            quarry,
            truck_v,
            truck_w,
            trailer,
            tarp,
            driver_1,
            driver_2,
        }
    }

    pub fn orders(&self) -> OrderController {
        OrderController::new(self.repo.clone(), 3)
    }

    pub fn resources(&self) -> ResourceController {
        ResourceController::new(self.repo.clone())
    }

    pub fn create_request(&self, from: Uuid, to: Uuid) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_id: self.customer_id,
            contract_id: None,
            from_location_id: from,
            to_location_id: to,
            vehicle_id: None,
            attachment_id: None,
            accessory_ids: Vec::new(),
            driver_id: None,
            cargo_items: vec![CargoItemRequest {
                description: "Bagged cement".to_string(),
                weight: Some(Decimal::new(28_000, 0)),
                volume: None,
                value: Some(Decimal::new(125_000, 2)),
            }],
            requested_at: None,
            eta: None,
            start_odometer: Decimal::new(150, 0),
            notes: None,
        }
    }

    pub async fn add_route(&self, from: Uuid, to: Uuid) {
        self.repo
            .add_route(CustomerRoute {
                id: Uuid::new_v4(),
                tenant_id: self.tenant_id,
                customer_id: self.customer_id,
                from_location_id: from,
                to_location_id: to,
            })
            .await;
    }

    pub async fn add_accessory(&self, name: &str) -> Uuid {
        add_resource(
            &self.repo,
            self.tenant_id,
            name,
            ResourceDetails::Accessory { serial_number: None },
        )
        .await
    }

    pub async fn add_customer_with_contract(&self, name: &str) -> (Uuid, Uuid) {
        let customer_id = Uuid::new_v4();
        self.repo
            .add_customer(Customer {
                id: customer_id,
                tenant_id: self.tenant_id,
                name: name.to_string(),
            })
            .await;

        let contract_id = Uuid::new_v4();
        self.repo
            .add_contract(Contract {
                id: contract_id,
                tenant_id: self.tenant_id,
                customer_id,
                reference: format!("{}-2025", name),
            })
            .await;

        (customer_id, contract_id)
    }
}

fn vehicle(registration: &str) -> ResourceDetails {
    ResourceDetails::Vehicle {
        registration: registration.to_string(),
        make: Some("Volvo".to_string()),
        model: Some("FH16".to_string()),
    }
}

async fn add_location(repo: &InMemoryWaybillRepository, tenant_id: Uuid, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    repo.add_location(Location {
        id,
        tenant_id,
        name: name.to_string(),
    })
    .await;
    id
}

async fn add_resource(
    repo: &InMemoryWaybillRepository,
    tenant_id: Uuid,
    name: &str,
    details: ResourceDetails,
) -> Uuid {
    let id = Uuid::new_v4();
    repo.add_resource(Resource {
        id,
        tenant_id,
        name: name.to_string(),
        created_at: Utc::now(),
        details,
    })
    .await;
    id
}

async fn add_driver(repo: &InMemoryWaybillRepository, tenant_id: Uuid, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    repo.add_driver(Driver {
        id,
        tenant_id,
        full_name: name.to_string(),
        license_number: None,
        default_vehicle_id: None,
    })
    .await;
    id
}
