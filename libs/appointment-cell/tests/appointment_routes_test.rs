mod common;

use axum::{body::Body, http::{Request, StatusCode}};
use serde_json::json;

use common::{booking, TestApp, DOCTOR, PATIENT};
use shared_database::{Collection, DocumentStore, Filter};
use shared_utils::test_utils::{JwtTestUtils, TestUser};

#[tokio::test]
async fn scheduling_creates_four_linked_records() {
    let app = TestApp::new();
    let id = app.book().await;

    for collection in [
        Collection::DoctorAppointments,
        Collection::PatientAppointments,
        Collection::DoctorHistory,
        Collection::PatientHistory,
    ] {
        let records = app.store.find(collection, &Filter::eq("appointmentId", &id)).await.unwrap();
        assert_eq!(records.len(), 1, "{}", collection);
        assert_eq!(records[0]["doctorEmail"], DOCTOR);
        assert_eq!(records[0]["patientEmail"], PATIENT);
        assert_eq!(records[0]["appointmentDate"], "2024-01-01");
        assert_eq!(records[0]["appointmentTime"], "09:00");
    }
    assert_eq!(app.total_records().await, 4);
}

#[tokio::test]
async fn scheduling_with_missing_field_persists_nothing() {
    let app = TestApp::new();
    let mut body = booking();
    body.as_object_mut().unwrap().remove("time");

    let (status, response) = app
        .call("POST", "/api/schedule-appointment", &TestUser::patient(PATIENT), Some(body))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "time is required");
    assert_eq!(app.total_records().await, 0);
}

#[tokio::test]
async fn scheduling_with_unreadable_body_is_a_bad_request() {
    let app = TestApp::new();
    let patient = TestUser::patient(PATIENT);

    let mut body = booking();
    body["patientName"] = json!(5);
    let (status, response) = app.call("POST", "/api/schedule-appointment", &patient, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().contains("patientName"));

    let (status, response) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/schedule-appointment")
                .header("Authorization", JwtTestUtils::bearer(&patient, &app.secret))
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].is_string());
    assert_eq!(app.total_records().await, 0);
}

#[tokio::test]
async fn only_a_party_to_the_booking_may_schedule_it() {
    let app = TestApp::new();

    let (status, _) = app.schedule(&TestUser::patient("someone@x.com")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.schedule(&TestUser::doctor(DOCTOR)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn listings_project_the_active_records() {
    let app = TestApp::new();
    let id = app.book().await;

    let (status, body) = app
        .call("GET", "/show/doctor/appointments/d@x.com", &TestUser::doctor(DOCTOR), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "appointmentId": id,
            "patientName": "P",
            "patientEmail": PATIENT,
            "appointmentTime": "09:00",
            "appointmentDate": "2024-01-01"
        }])
    );

    let (status, body) = app
        .call("GET", "/show/patient/appointments/p@x.com", &TestUser::patient(PATIENT), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["doctorName"], "Dr. X");
    assert_eq!(body[0].get("patientName"), None);

    let (status, body) = app
        .call("GET", "/show/patient/appointments/nobody@x.com", &TestUser::patient("nobody@x.com"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn listings_are_owner_only() {
    let app = TestApp::new();
    app.book().await;

    let (status, _) = app
        .call("GET", "/show/doctor/appointments/d@x.com", &TestUser::patient(PATIENT), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call("GET", "/patient/history/appointments/p@x.com", &TestUser::patient("q@x.com"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Request::builder().uri("/show/doctor/appointments/d@x.com").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn doctor_appointment_lookup_by_id() {
    let app = TestApp::new();
    let id = app.book().await;

    let (status, body) = app
        .call("GET", &format!("/doctor/appointments/{}", id), &TestUser::patient(PATIENT), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["appointmentId"], id.as_str());
    assert!(body[0]["_id"].is_string());

    let (status, _) = app
        .call("GET", &format!("/doctor/appointments/{}", id), &TestUser::doctor("e@x.com"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call("GET", "/doctor/appointments/unknown", &TestUser::doctor(DOCTOR), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_removes_active_records_and_keeps_history() {
    let app = TestApp::new();
    let id = app.book().await;
    let patient = TestUser::patient(PATIENT);

    let (status, body) = app.call("DELETE", &format!("/cancel/appointment/{}", id), &patient, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Appointment cancelled successfully");

    assert_eq!(app.store.len(Collection::DoctorAppointments).await, 0);
    assert_eq!(app.store.len(Collection::PatientAppointments).await, 0);
    assert_eq!(app.store.len(Collection::DoctorHistory).await, 1);
    assert_eq!(app.store.len(Collection::PatientHistory).await, 1);

    let (status, _) = app.call("DELETE", &format!("/cancel/appointment/{}", id), &patient, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_unknown_or_foreign_appointment_changes_nothing() {
    let app = TestApp::new();
    let id = app.book().await;

    let (status, body) = app
        .call("DELETE", "/cancel/appointment/does-not-exist", &TestUser::patient(PATIENT), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Appointment not found");

    let (status, _) = app
        .call("DELETE", &format!("/cancel/appointment/{}", id), &TestUser::patient("q@x.com"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.total_records().await, 4);
}

#[tokio::test]
async fn cancel_finishes_a_half_cancelled_booking() {
    let app = TestApp::new();
    let id = app.book().await;
    app.store
        .delete_one(Collection::PatientAppointments, &Filter::eq("appointmentId", &id))
        .await
        .unwrap();

    let (status, _) = app
        .call("DELETE", &format!("/cancel/appointment/{}", id), &TestUser::doctor(DOCTOR), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.len(Collection::DoctorAppointments).await, 0);
}

#[tokio::test]
async fn histories_and_their_ordering() {
    let app = TestApp::new();
    let doctor = TestUser::doctor(DOCTOR);

    let (status, body) = app.call("GET", "/doctor/history/appointments/d@x.com", &doctor, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No history found");

    let first = app.book().await;
    let second = app.book().await;

    let (status, body) = app.call("GET", "/doctor/history/appointments/d@x.com", &doctor, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body[0],
        json!({
            "patientName": "P",
            "date": "01/01/2024",
            "time": "09:00",
            "prescription": "",
            "appointmentId": second
        })
    );
    assert_eq!(body[1]["appointmentId"], first.as_str());

    let (status, body) = app.call("GET", "/doctor/history/d@x.com", &doctor, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["appointmentId"], second.as_str());
    assert_eq!(body[0]["appointmentDate"], "2024-01-01");

    let (status, body) = app
        .call("GET", "/patient/history/appointments/p@x.com", &TestUser::patient(PATIENT), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["appointmentId"], first.as_str());
    assert_eq!(body[0]["doctorName"], "Dr. X");
}

#[tokio::test]
async fn prescription_is_attached_to_both_histories_and_served() {
    let app = TestApp::new();
    let id = app.book().await;
    let bytes = b"%PDF-1.4 prescription";

    let (status, body) = app.upload_prescription(&TestUser::doctor(DOCTOR), &id, "prescription", bytes).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Prescription uploaded successfully.");
    let url = body["prescriptionUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/prescriptions/"));

    let filter = Filter::eq("appointmentId", &id);
    let doctor_side = app.store.find_one(Collection::DoctorHistory, &filter).await.unwrap().unwrap();
    let patient_side = app.store.find_one(Collection::PatientHistory, &filter).await.unwrap().unwrap();
    assert_eq!(doctor_side["prescription"], url.as_str());
    assert_eq!(patient_side["prescription"], url.as_str());

    let (status, served) = app
        .send_raw(Request::builder().uri(url.as_str()).body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, bytes.to_vec());
}

#[tokio::test]
async fn prescription_upload_rejections() {
    let app = TestApp::new();
    let id = app.book().await;
    let doctor = TestUser::doctor(DOCTOR);

    let (status, body) = app.upload_prescription(&doctor, &id, "file", b"x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No prescription file uploaded.");

    let (status, _) = app.upload_prescription(&TestUser::patient(PATIENT), &id, "prescription", b"x").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.upload_prescription(&TestUser::doctor("e@x.com"), &id, "prescription", b"x").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.upload_prescription(&doctor, "unknown", "prescription", b"x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(app.stored_prescriptions(), 0);
}

#[tokio::test]
async fn missing_prescription_file_is_not_found() {
    let app = TestApp::new();
    let (status, _) = app
        .send_raw(
            Request::builder()
                .uri("/uploads/prescriptions/nothing-here.pdf")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
