mod common;

use common::{path_str, FakeMush, TestEnv};

#[test]
fn install_from_source_resolves_search_and_sends_lines() {
    let env = TestEnv::new();
    let server = FakeMush::start("RhostMUSH 4.0 patchlevel 2", "#42");
    let host = env.write_host_config(server.port);
    env.write(
        "jobs.mush",
        "#:SEARCH JGO Job Global Object <JGO>\n\
         &cmd.jobs JGO=$+jobs:\n\
         \x20   @pemit %#=Jobs live on JGO\n",
    );

    let report = env.run_json(&["install", "-s", "jobs.mush", "-H", path_str(&host)]);
    assert_eq!(report["ok"], true);
    assert_eq!(report["data"]["resolved"][0]["key"], "JGO");
    assert_eq!(report["data"]["resolved"][0]["answer"], "#42");
    assert_eq!(report["data"]["lines_sent"], 2);

    let received = server.received();
    assert_eq!(received[0], "connect Builder secret");
    assert_eq!(received[1], "@set me=!verbose !puppet !trace");
    assert_eq!(received[2], "@version");
    assert!(received[3].starts_with("think "));
    assert!(received[3].contains("objects=Job Global Object <JGO>"));
    assert_eq!(
        &received[4..],
        &["", "&cmd.jobs #42=$+jobs:@pemit %#=Jobs live on #42"]
    );
}

#[test]
fn predefined_search_key_skips_the_probe() {
    let env = TestEnv::new();
    let server = FakeMush::start("RhostMUSH", "#42");
    let host = env.write_host_config(server.port);
    env.write("a.mush", "#:SEARCH JGO Job Global Object <JGO>\n@tr JGO/run\n");

    env.run_json(&[
        "install",
        "-s",
        "a.mush",
        "-H",
        path_str(&host),
        "-D",
        "JGO=#9",
    ]);

    let received = server.received();
    assert!(received.iter().all(|l| !l.starts_with("think ")));
    assert_eq!(received.last().map(String::as_str), Some("@tr #9/run"));
}

#[test]
fn install_compiled_files_sends_them_verbatim() {
    let env = TestEnv::new();
    let server = FakeMush::start("RhostMUSH", "#1");
    let host = env.write_host_config(server.port);
    let compiled = env.write("built.txt", "@create Widget\n&a Widget=1\n");

    let report = env.run_json(&["install", "-c", path_str(&compiled), "-H", path_str(&host)]);
    assert_eq!(report["data"]["lines_sent"], 4);

    let received = server.received();
    assert_eq!(&received[3..], &["@create Widget", "&a Widget=1", "", ""]);
}

#[test]
fn non_rhost_server_is_refused_before_sending_code() {
    let env = TestEnv::new();
    let server = FakeMush::start("PennMUSH 1.8.8", "#1");
    let host = env.write_host_config(server.port);
    env.write("a.mush", "@create Widget\n");

    let err = env.run_json_failure(&["install", "-s", "a.mush", "-H", path_str(&host)]);
    assert_eq!(err["error"]["code"], "UNSUPPORTED_HOST");

    let received = server.received();
    assert!(received.iter().all(|l| l != "@create Widget"));
}

#[test]
fn empty_search_answer_aborts_install() {
    let env = TestEnv::new();
    let server = FakeMush::start("RhostMUSH", "");
    let host = env.write_host_config(server.port);
    env.write("a.mush", "#:SEARCH JGO Missing Thing\n@tr JGO\n");

    env.cmd()
        .args(["install", "-s", "a.mush", "-H", path_str(&host)])
        .assert()
        .code(7);

    let received = server.received();
    assert!(received.iter().all(|l| !l.starts_with("@tr")));
}

#[test]
fn unreachable_host_is_connection_failed() {
    let env = TestEnv::new();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let host = env.write_host_config(port);
    env.write("a.mush", "@emit hi\n");

    let err = env.run_json_failure(&["install", "-s", "a.mush", "-H", path_str(&host)]);
    assert_eq!(err["error"]["code"], "CONNECTION_FAILED");
}

#[test]
fn incomplete_host_config_is_rejected() {
    let env = TestEnv::new();
    let host = env.write("host.toml", "[host]\naddress = \"127.0.0.1\"\nport = 4201\n");
    env.write("a.mush", "@emit hi\n");

    let err = env.run_json_failure(&["install", "-s", "a.mush", "-H", path_str(&host)]);
    assert_eq!(err["error"]["code"], "HOST_CONFIG_INVALID");
}
