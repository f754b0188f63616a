use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn stop_container_on_a_missing_id_file_is_a_no_op() {
    let tmp = tempdir().expect("tempdir");
    let id_file = tmp.path().join("absent.id");
    stop_container(&id_file, Duration::from_secs(1)).await.expect("stop_container");
}

#[test]
fn container_spec_formats_the_workspace_mount_as_host_colon_container() {
    let spec = ContainerSpec {
        name: "stigmer-agent-runner".into(),
        image: "stigmer/agent-runner:latest".into(),
        env: vec![("MODE".into(), "local".into())],
        workspace_mount: (PathBuf::from("/home/user/.stigmer/workspace"), "/workspace".into()),
    };
    let mount = format!("{}:{}", spec.workspace_mount.0.display(), spec.workspace_mount.1);
    assert_eq!(mount, "/home/user/.stigmer/workspace:/workspace");
}

#[yare::parameterized(
    lowercase_message = { "Cannot connect to the Docker daemon at unix:///var/run/docker.sock. Is the docker daemon running?" },
    shell_wrapped = { "docker: Cannot connect to the Docker daemon at tcp://localhost:2375.\nIs the docker daemon running?\n" },
    mixed_case = { "CANNOT CONNECT TO THE DOCKER DAEMON at unix:///var/run/docker.sock" },
)]
fn is_daemon_unreachable_recognizes_dockers_daemon_down_wording(stderr: &str) {
    assert!(is_daemon_unreachable(stderr));
}

#[test]
fn is_daemon_unreachable_does_not_flag_unrelated_docker_errors() {
    assert!(!is_daemon_unreachable("Error response from daemon: No such image: nope:latest"));
    assert!(!is_daemon_unreachable("docker: Error response from daemon: Conflict. The container name is already in use"));
}
