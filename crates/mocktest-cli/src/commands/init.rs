//! The `mocktest init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    for (name, content) in [
        ("mocktest.toml", SAMPLE_CONFIG),
        ("test-config.toml", SAMPLE_TEST_CONFIG),
        ("answer-key.csv", SAMPLE_ANSWER_KEY),
    ] {
        if Path::new(name).exists() {
            println!("{name} already exists, skipping.");
        } else {
            std::fs::write(name, content)?;
            println!("Created {name}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Edit test-config.toml and fill in answer-key.csv");
    println!("  2. Run: mocktest validate --test-config test-config.toml --answer-key answer-key.csv");
    println!("  3. Run: mocktest start --test-config test-config.toml --answer-key answer-key.csv");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mocktest engine configuration

storage_dir = ".mocktest"
session_key = "mockTestState"
autosave_interval_secs = 10
tick_interval_ms = 1000

# "placeholder" substitutes a default answer for unkeyed questions,
# "strict" refuses to start.
missing_key_policy = "placeholder"

[scoring]
numerical_tolerance = 0.01

[scoring.partial_credit]
mode = "per-option"
points = 1.0
"#;

const SAMPLE_TEST_CONFIG: &str = r#"name = "JEE Main Mock Test"
duration_minutes = 180

[physics.single_correct]
start = 1
end = 20
marks = 4.0
negative_mark = -1.0

[physics.multi_correct]
start = 21
end = 25
marks = 4.0
negative_mark = -2.0

[physics.numerical]
start = 26
end = 30
marks = 4.0
negative_mark = 0.0

[chemistry.single_correct]
start = 31
end = 50
marks = 4.0
negative_mark = -1.0

[chemistry.multi_correct]
start = 51
end = 55
marks = 4.0
negative_mark = -2.0

[chemistry.numerical]
start = 56
end = 60
marks = 4.0
negative_mark = 0.0

[mathematics.single_correct]
start = 61
end = 80
marks = 4.0
negative_mark = -1.0

[mathematics.multi_correct]
start = 81
end = 85
marks = 4.0
negative_mark = -2.0

[mathematics.numerical]
start = 86
end = 90
marks = 4.0
negative_mark = 0.0
"#;

const SAMPLE_ANSWER_KEY: &str = "Question,Answer
1,B
2,D
21,\"A,C\"
26,25.5
31,A
61,C
";
