use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use petharbor::workflows::adoption::{adoption_router, InMemoryAdoptionService, NewPet, NewShelter};

fn seed(service: &InMemoryAdoptionService) -> Vec<u64> {
    let shelters = [
        ("Aurora shelter", "Aurora, CO", false, 9),
        ("RGV animal shelter", "Harlingen, TX", false, 5),
        ("Fancy pets of Colorado", "Denver, CO", true, 10),
    ]
    .into_iter()
    .map(|(name, city, foster_program, rank)| {
        service
            .create_shelter(NewShelter {
                name: name.to_string(),
                city: city.to_string(),
                foster_program,
                rank,
            })
            .expect("shelter created")
    })
    .collect::<Vec<_>>();

    for (shelter, name, breed, age) in [
        (0, "Mr. Pirate", "tuxedo shorthair", 5),
        (0, "Clawdia", "shorthair", 3),
        (2, "Lucille Bald", "sphynx", 8),
    ] {
        service
            .add_pet(
                shelters[shelter].id,
                NewPet {
                    name: name.to_string(),
                    breed: breed.to_string(),
                    age,
                    adoptable: true,
                },
            )
            .expect("pet created");
    }

    shelters.iter().map(|shelter| shelter.id.0).collect()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn admin_index_lists_shelters_by_rank() {
    let service = Arc::new(InMemoryAdoptionService::in_memory());
    let ids = seed(&service);

    let response = adoption_router(service)
        .oneshot(Request::get("/admin/shelters").body(Body::empty()).expect("request"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json(response).await;
    let rows = payload.as_array().expect("array payload");
    let order: Vec<u64> = rows
        .iter()
        .filter_map(|row| row["id"].as_u64())
        .collect();
    assert_eq!(order, vec![ids[2], ids[0], ids[1]]);

    assert_eq!(rows[0]["dom_id"], json!(format!("shelter-{}", ids[2])));
    assert_eq!(rows[0]["name"], json!("Fancy pets of Colorado"));
    assert_eq!(rows[1]["name"], json!("Aurora shelter"));
    assert_eq!(rows[2]["name"], json!("RGV animal shelter"));
}

#[tokio::test]
async fn shelter_pets_are_listed_per_shelter() {
    let service = Arc::new(InMemoryAdoptionService::in_memory());
    let ids = seed(&service);

    let response = adoption_router(service)
        .oneshot(
            Request::get(format!("/shelters/{}/pets", ids[0]))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");

    let payload = read_json(response).await;
    let names: Vec<&str> = payload
        .as_array()
        .expect("array payload")
        .iter()
        .filter_map(|pet| pet["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Mr. Pirate", "Clawdia"]);
}

#[tokio::test]
async fn shelters_and_pets_can_be_created_over_http() {
    let service = Arc::new(InMemoryAdoptionService::in_memory());
    let router = adoption_router(service.clone());

    let response = router
        .clone()
        .oneshot(
            Request::post("/shelters")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "name": "Mystery Building", "city": "Irvine CA", "rank": 9 })
                        .to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let shelter = read_json(response).await;
    let shelter_id = shelter["id"].as_u64().expect("numeric id");
    assert_eq!(shelter["foster_program"], json!(false));

    let response = router
        .clone()
        .oneshot(
            Request::post(format!("/shelters/{shelter_id}/pets"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "name": "Scooby", "breed": "Great Dane", "age": 2 }).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let pet = read_json(response).await;
    assert_eq!(pet["adoptable"], json!(true));
    assert_eq!(pet["shelter_id"], json!(shelter_id));

    let response = router
        .oneshot(
            Request::post("/shelters/77/pets")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "name": "Ghost" }).to_string()))
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
