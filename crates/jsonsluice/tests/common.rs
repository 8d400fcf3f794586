#![allow(missing_docs, dead_code)]

pub const ORIGINAL: &str = r#"
{
    "catalog": {
        "fruits": {
            "apple": {
                "color": "red",
                "mass_g": 182.5
            },
            "pear": {
                "color": "yellow",
                "mass_g": null
            }
        },
        "tags": [
            "fresh",
            {
                "kind": "origin",
                "value": "local"
            },
            [
                "nested"
            ],
            true
        ]
    },
    "trailing": {
        "status": "ok"
    }
}"#;

// The same document minified and cut on transition seams: chunk edges land
// inside strings, numbers, escapes, and between closing brackets to exercise
// the incremental lexer.
#[rustfmt::skip]
pub const STREAM: [&str; 12] = [
    r#"{"catalog":{"fru"#,                       // splits the key "fruits"
    r#"its":{"apple":{"color":"re"#,             // splits the string "red"
    r#"d","mass_g":182"#,                        // splits the number 182.5
    r#".5},"pear":{"color":"yellow","mass_"#,    // splits a key
    r#"g":null}"#,                               // ends on an object close
    r#"},"tags":["fresh",{"ki"#,                 // object end -> array open
    r#"nd":"origin","va"#,                       // splits a key
    r#"lue":"local"}"#,                          // ends on an object close
    r#",["nest"#,                                // nested array, split string
    r#"ed"],tr"#,                                // splits the literal true
    r#"ue]},"trailing":{"status":"o"#,           // splits the string "ok"
    r#"k"}}"#,                                   // closes the root
];

#[test]
fn stream_matches_original() {
    let streamed = STREAM.concat();

    let value: serde_json::Value = serde_json::from_str(ORIGINAL).unwrap();
    let original = serde_json::to_string(&value).unwrap();

    assert_eq!(streamed, original);
}
