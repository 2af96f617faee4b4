// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! `cvm-count`: estimate the number of distinct keys in a stream.
//!
//! Reads whitespace-delimited decimal keys from a file (or stdin) and prints
//! the final buffer occupancy, threshold, and distinct-count estimate.

use std::error::Error;
use std::fs;
use std::io;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cvmsketch::cvm::CvmSketch;
use cvmsketch::cvm::DEFAULT_CAPACITY;
use cvmsketch::cvm::DEFAULT_MAX_HEIGHT;

#[derive(Debug, Parser)]
#[command(name = "cvm-count", about = "Estimate the number of distinct keys in a stream")]
struct Args {
    /// File of whitespace-delimited decimal keys; stdin when omitted.
    input: Option<PathBuf>,

    /// Buffer capacity: the number of samples kept in memory. Larger values
    /// tighten the estimate at a proportional memory cost.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Height bound for the buffer tree; operations that run into it fail
    /// instead of looping.
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT)]
    max_height: usize,

    /// Seed for a reproducible run; defaults to OS entropy.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let text = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let mut builder = CvmSketch::<u32>::builder()
        .capacity(args.capacity)
        .max_height(args.max_height);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let mut sketch: CvmSketch<u32> = builder.build();

    for token in text.split_whitespace() {
        let key: u32 = token
            .parse()
            .map_err(|_| format!("invalid key {token:?}: expected a decimal u32"))?;
        sketch.update(key)?;
    }

    println!("retained: {}", sketch.num_retained());
    println!("threshold: {:.6}", sketch.threshold().to_f64());
    println!("estimate: {}", sketch.estimate());
    Ok(())
}
