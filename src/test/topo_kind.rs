use crate::net::{ImpairmentProfile, delay_str};
use crate::topo::{
    self, CpuShareRule, DEFAULT_MAX_LINKS, DEFAULT_MAX_MESH_LINKS, Footprint, KindName,
    TopoError, TopoOpts, TopologyKind, build_from_args, mesh::mesh_link_count, parse_size,
};
use std::time::Duration;

#[test]
fn parses_kind_and_size() {
    assert_eq!(
        TopologyKind::parse("linear", "3").unwrap(),
        TopologyKind::Linear(3)
    );
    assert_eq!(
        TopologyKind::parse(" Mesh ", "5").unwrap(),
        TopologyKind::Mesh(5)
    );
    assert_eq!(
        TopologyKind::from_parts("tree", 2).unwrap(),
        TopologyKind::Tree(2)
    );
    assert_eq!(KindName::Single.with_size(9).n(), 9);
    assert_eq!(TopologyKind::Tree(4).to_string(), "tree 4");
}

#[test]
fn unknown_kind_fails_for_every_size() {
    for n in ["1", "3", "100", "0", "-2"] {
        let err = build_from_args("ring", n, &TopoOpts::default()).unwrap_err();
        assert_eq!(err, TopoError::InvalidTopologyKind("ring".to_string()));
    }
    assert!(matches!(
        TopologyKind::from_parts("ring", -1),
        Err(TopoError::InvalidTopologyKind(_))
    ));
}

#[test]
fn non_positive_or_non_integer_size_fails_for_every_kind() {
    for kind in KindName::ALL {
        for n in ["0", "-1", "-20", "abc", "2.5", ""] {
            let err = build_from_args(kind.as_str(), n, &TopoOpts::default()).unwrap_err();
            assert!(
                matches!(err, TopoError::InvalidSize(_)),
                "{kind} {n:?}: {err:?}"
            );
        }
        for n in [0, -1, i64::MIN] {
            assert!(matches!(
                TopologyKind::from_parts(kind.as_str(), n),
                Err(TopoError::InvalidSize(_))
            ));
        }
    }
    assert!(matches!(
        topo::build(TopologyKind::Linear(0), &TopoOpts::default()),
        Err(TopoError::InvalidSize(_))
    ));
    assert_eq!(parse_size(" 7 "), Ok(7));
}

#[test]
fn mesh_over_the_link_limit_fails_fast() {
    assert_eq!(mesh_link_count(100), Some(DEFAULT_MAX_MESH_LINKS));
    assert_eq!(mesh_link_count(usize::MAX), None);

    assert!(topo::build(TopologyKind::Mesh(100), &TopoOpts::default()).is_ok());
    let err = topo::build(TopologyKind::Mesh(101), &TopoOpts::default()).unwrap_err();
    assert_eq!(
        err,
        TopoError::ResourceExhaustion {
            n: 101,
            links: 5050,
            max: DEFAULT_MAX_MESH_LINKS
        }
    );

    let opts = TopoOpts {
        max_mesh_links: 2,
        ..TopoOpts::default()
    };
    assert!(topo::build(TopologyKind::Mesh(2), &opts).is_ok());
    assert!(matches!(
        topo::build(TopologyKind::Mesh(3), &opts),
        Err(TopoError::ResourceExhaustion { .. })
    ));
    // max_mesh_links 只约束 mesh
    assert!(topo::build(TopologyKind::Linear(500), &opts).is_ok());
}

#[test]
fn footprint_counts_nodes_and_links() {
    let fp = |kind| Footprint::of(kind).expect("footprint");
    assert_eq!(fp(TopologyKind::Single(9)), Footprint { nodes: 4, links: 3 });
    assert_eq!(fp(TopologyKind::Linear(3)), Footprint { nodes: 6, links: 5 });
    assert_eq!(fp(TopologyKind::Tree(4)), Footprint { nodes: 12, links: 11 });
    assert_eq!(fp(TopologyKind::Mesh(5)), Footprint { nodes: 10, links: 15 });

    assert_eq!(Footprint::of(TopologyKind::Linear(usize::MAX)), None);
    assert_eq!(Footprint::of(TopologyKind::Tree(usize::MAX / 2)), None);
    assert_eq!(Footprint::of(TopologyKind::Mesh(usize::MAX)), None);
}

#[test]
fn huge_sizes_fail_before_allocating() {
    let err = topo::build(TopologyKind::Tree(usize::MAX / 2), &TopoOpts::default()).unwrap_err();
    assert_eq!(
        err,
        TopoError::ResourceExhaustion {
            n: usize::MAX / 2,
            links: usize::MAX,
            max: DEFAULT_MAX_LINKS
        }
    );

    let err = build_from_args("linear", "18446744073709551615", &TopoOpts::default()).unwrap_err();
    assert!(matches!(err, TopoError::ResourceExhaustion { links: usize::MAX, .. }));

    // 不溢出但远超上限
    let err = topo::build(TopologyKind::Linear(1_000_000_000_000), &TopoOpts::default())
        .unwrap_err();
    assert_eq!(
        err,
        TopoError::ResourceExhaustion {
            n: 1_000_000_000_000,
            links: 1_999_999_999_999,
            max: DEFAULT_MAX_LINKS
        }
    );

    // 放开上限也不会溢出 panic
    let opts = TopoOpts {
        max_links: usize::MAX,
        max_mesh_links: usize::MAX,
        ..TopoOpts::default()
    };
    assert!(matches!(
        topo::build(TopologyKind::Mesh(usize::MAX), &opts),
        Err(TopoError::ResourceExhaustion { .. })
    ));
}

#[test]
fn link_limit_applies_to_every_kind() {
    let opts = TopoOpts {
        max_links: 5,
        ..TopoOpts::default()
    };
    assert!(topo::build(TopologyKind::Linear(3), &opts).is_ok());
    assert!(topo::build(TopologyKind::Single(100), &opts).is_ok());
    for kind in [
        TopologyKind::Linear(4),
        TopologyKind::Tree(3),
        TopologyKind::Mesh(3),
    ] {
        assert!(
            matches!(
                topo::build(kind, &opts),
                Err(TopoError::ResourceExhaustion { max: 5, .. })
            ),
            "{kind} should exceed the link limit"
        );
    }
}

#[test]
fn cpu_share_rules() {
    assert_eq!(CpuShareRule::default().share(4), 0.125);
    assert_eq!(CpuShareRule::Scaled { k: 0.5 }.share(4), 2.0);
    assert_eq!(CpuShareRule::Fixed { share: 0.3 }.share(4), 0.3);
}

#[test]
fn topo_opts_parse_from_partial_json() {
    let opts: TopoOpts = serde_json::from_str("{}").expect("parse empty opts");
    assert_eq!(opts, TopoOpts::default());

    let raw = r#"
    {
        "link": { "bandwidth_mbps": 100, "delay": "2ms" },
        "cpu_share": { "rule": "scaled", "k": 0.25 },
        "max_mesh_links": 10,
        "max_links": 64
    }
    "#;
    let opts: TopoOpts = serde_json::from_str(raw).expect("parse opts");
    assert_eq!(opts.link.bandwidth_mbps, 100);
    assert_eq!(opts.link.delay, Duration::from_millis(2));
    assert_eq!(opts.link.loss_percent, 10.0);
    assert_eq!(opts.link.max_queue_pkts, 1000);
    assert_eq!(opts.cpu_share, CpuShareRule::Scaled { k: 0.25 });
    assert_eq!(opts.max_mesh_links, 10);
    assert_eq!(opts.max_links, 64);
}

#[test]
fn delay_strings() {
    assert_eq!(delay_str::parse("5ms"), Ok(Duration::from_millis(5)));
    assert_eq!(delay_str::parse("250us"), Ok(Duration::from_micros(250)));
    assert_eq!(delay_str::parse("1s"), Ok(Duration::from_secs(1)));
    assert_eq!(delay_str::parse("1.5ms"), Ok(Duration::from_micros(1500)));
    assert!(delay_str::parse("5 parsecs").is_err());
    assert!(delay_str::parse("ms").is_err());

    assert_eq!(delay_str::format(Duration::from_millis(5)), "5ms");
    assert_eq!(delay_str::format(Duration::from_micros(250)), "250us");
    assert_eq!(delay_str::format(Duration::from_secs(2)), "2s");
}

#[test]
fn topology_serializes_kind_and_profile() {
    let topo = topo::build(TopologyKind::Single(2), &TopoOpts::default()).unwrap();
    let v = serde_json::to_value(&topo).expect("serialize topology");
    assert_eq!(v["kind"]["kind"], "single");
    assert_eq!(v["kind"]["n"], 2);
    assert_eq!(v["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(v["nodes"][0]["kind"], "switch");
    assert_eq!(v["nodes"][1]["cpu_share"], 0.25);
    assert_eq!(v["links"][0]["profile"]["delay"], "5ms");
    assert_eq!(v["links"][0]["profile"]["max_queue_pkts"], 1000);

    let profile: ImpairmentProfile =
        serde_json::from_value(v["links"][0]["profile"].clone()).expect("parse profile");
    assert_eq!(profile, ImpairmentProfile::default());
}
