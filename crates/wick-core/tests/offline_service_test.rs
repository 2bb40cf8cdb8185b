//! End-to-end tests over the public API using local manifest documents.

use wick_core::{ServiceState, WickDownloader, WickError};

const APP_JSON: &str = r#"{
    "elements": [{
        "appName": "Fortnite",
        "labelName": "Live-Windows",
        "buildVersion": "++Fortnite+Release-12.41",
        "manifests": [{
            "uri": "https://download.example.com/Builds/Fortnite/CloudDir/abc.manifest",
            "queryParams": [{"name": "token", "value": "xyz"}]
        }]
    }]
}"#;

const CHUNK_JSON: &str = r#"{
    "AppNameString": "FortniteGame",
    "BuildVersionString": "++Fortnite+Release-12.41",
    "FileManifestList": [
        {
            "Filename": "FortniteGame/Content/Paks/pakchunk0-WindowsClient.pak",
            "FileChunkParts": [
                {"Guid": "AAAA0000AAAA0000AAAA0000AAAA0000", "Offset": "000000000000000000000000", "Size": "000016000000000000000000"}
            ]
        },
        {
            "Filename": "FortniteGame/Content/Paks/pakchunk0-WindowsClient.sig",
            "FileChunkParts": [
                {"Guid": "AAAA0000AAAA0000AAAA0000AAAA0000", "Offset": "000016000000000000000000", "Size": "064000000000000000000000"}
            ]
        },
        {
            "Filename": "FortniteGame/Content/Paks/pakchunk1-WindowsClient.pak",
            "FileChunkParts": [
                {"Guid": "BBBB0000BBBB0000BBBB0000BBBB0000", "Offset": "000000000000000000000000", "Size": "000016000000000000000000"}
            ]
        }
    ],
    "ChunkHashList": {
        "AAAA0000AAAA0000AAAA0000AAAA0000": "001000000000000000000000",
        "BBBB0000BBBB0000BBBB0000BBBB0000": "002000000000000000000000"
    },
    "DataGroupList": {
        "AAAA0000AAAA0000AAAA0000AAAA0000": "000",
        "BBBB0000BBBB0000BBBB0000BBBB0000": "001"
    }
}"#;

#[test]
fn service_from_local_manifests() {
    let service = ServiceState::from_manifests(APP_JSON, CHUNK_JSON).unwrap();
    assert_eq!(service.app_name(), "Fortnite");
    assert_eq!(service.build_version(), "++Fortnite+Release-12.41");
}

#[test]
fn pak_listing_is_ordered_and_filtered() {
    let service = ServiceState::from_manifests(APP_JSON, CHUNK_JSON).unwrap();
    // The .sig file is not a pak; order follows the manifest
    assert_eq!(
        service.get_paks(),
        vec![
            "pakchunk0-WindowsClient.pak",
            "pakchunk1-WindowsClient.pak"
        ]
    );
}

#[tokio::test]
async fn unknown_pak_is_reported() {
    let service = ServiceState::from_manifests(APP_JSON, CHUNK_JSON).unwrap();
    let err = service.get_pak("pakchunk7-WindowsClient.pak").await.unwrap_err();
    assert!(matches!(err, WickError::PakNotFound { .. }));
    assert!(err.to_string().contains("pakchunk7"));
}

#[tokio::test]
async fn downloader_facade_runs_the_script_flow_offline() {
    let mut downloader = WickDownloader::new();

    // Before start-up every operation refuses to run
    assert!(matches!(
        downloader.get_paks().unwrap_err(),
        WickError::ServiceNotStarted
    ));

    downloader
        .start_with_manifests(APP_JSON, CHUNK_JSON)
        .unwrap();

    let paks = downloader.get_paks().unwrap();
    assert_eq!(paks[0], "pakchunk0-WindowsClient.pak");

    // Restarting replaces the service rather than erroring
    downloader
        .start_with_manifests(APP_JSON, CHUNK_JSON)
        .unwrap();
    assert_eq!(downloader.get_paks().unwrap().len(), 2);
}

#[test]
fn malformed_manifests_are_rejected() {
    assert!(ServiceState::from_manifests("not json", CHUNK_JSON).is_err());
    assert!(ServiceState::from_manifests(APP_JSON, "not json").is_err());

    let bad_blob = CHUNK_JSON.replace("000016000000000000000000", "00");
    let err = ServiceState::from_manifests(APP_JSON, &bad_blob).unwrap_err();
    assert!(matches!(err, WickError::InvalidManifest { .. }));
}
