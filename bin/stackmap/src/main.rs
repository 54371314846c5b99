mod assembly;

use assembly::AssemblyError;
use stackmap::jvm::class_graph::{ClassGraph, ClassGraphArenas};
use stackmap::jvm::code::MethodBody;
use stackmap::jvm::verifier::{
    analyze, serialize_stack_map_table, AnalysisSettings, ClassIndexer,
};
use stackmap::jvm::*;

use clap::{crate_version, value_parser, Arg, ArgAction, Command};
use std::collections::HashMap;
use std::fs;

#[derive(Debug)]
enum Failure {
    Jvm(Error),
    Assembly(AssemblyError),
    Method { method: String, error: Error },
}

impl From<Error> for Failure {
    fn from(err: Error) -> Failure {
        Failure::Jvm(err)
    }
}

impl From<AssemblyError> for Failure {
    fn from(err: AssemblyError) -> Failure {
        Failure::Assembly(err)
    }
}

/// Hands out constant pool indices for classes in order of first use
#[derive(Default)]
struct ClassConstants {
    indices: HashMap<RefType<BinaryName>, u16>,
    classes: Vec<RefType<BinaryName>>,
}

impl ClassIndexer for ClassConstants {
    fn class_index(&mut self, class: &RefType<BinaryName>) -> Result<u16, Error> {
        if let Some(index) = self.indices.get(class) {
            return Ok(*index);
        }
        let index = u16::try_from(self.classes.len() + 1).map_err(|_| {
            Error::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "too many classes for a constant pool",
            ))
        })?;
        self.indices.insert(class.clone(), index);
        self.classes.push(class.clone());
        Ok(index)
    }
}

fn main() -> Result<(), Failure> {
    env_logger::init();

    let matches = Command::new("JVM stack map frame calculator")
        .version(crate_version!())
        .author("Alec Theriault <alec.theriault@gmail.com>")
        .about("Compute the StackMapTable of methods written in a textual bytecode assembly")
        .arg(
            Arg::new("explicit-entry-frame")
                .long("explicit-entry-frame")
                .action(ArgAction::SetTrue)
                .help("Also emit a frame for the first instruction when it is not a jump target"),
        )
        .arg(
            Arg::new("no-prune")
                .long("no-prune")
                .action(ArgAction::SetTrue)
                .help("Keep locals alive past the end of their local variable table entry"),
        )
        .arg(
            Arg::new("max-visits")
                .long("max-visits")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Give up after interpreting one instruction this many times"),
        )
        .arg(
            Arg::new("hex")
                .long("hex")
                .action(ArgAction::SetTrue)
                .help("Also print the serialized StackMapTable attribute body"),
        )
        .arg(
            Arg::new("INPUT")
                .help("Sets the input assembly file to use")
                .required(true)
                .index(1),
        )
        .get_matches();

    let mut settings = AnalysisSettings::new();
    settings.implicit_entry_frame = !matches.get_flag("explicit-entry-frame");
    settings.prune_out_of_scope_locals = !matches.get_flag("no-prune");
    if let Some(max_visits) = matches.get_one::<usize>("max-visits") {
        settings.max_visits_per_instruction = *max_visits;
    }
    let hex = matches.get_flag("hex");

    let input = matches
        .get_one::<String>("INPUT")
        .map(String::as_str)
        .unwrap_or_default();
    log::info!("Reading '{}'", input);
    let source = fs::read_to_string(input).map_err(Error::IoError)?;
    let program = assembly::parse(&source)?;

    let class_graph_arenas = ClassGraphArenas::new();
    let class_graph = ClassGraph::new(&class_graph_arenas);
    class_graph.insert_java_library_types();
    for class in &program.classes {
        class.add_to_graph(&class_graph)?;
    }

    for method in &program.methods {
        let qualified = format!(
            "{}.{}{}",
            method.declaring_class,
            method.name,
            method.descriptor.render()
        );
        log::info!("Computing frames for {}", qualified);
        report(method, &class_graph, &settings, hex).map_err(|error| Failure::Method {
            method: qualified,
            error,
        })?;
    }

    Ok(())
}

fn report(
    method: &MethodBody,
    class_graph: &ClassGraph<'_>,
    settings: &AnalysisSettings,
    hex: bool,
) -> Result<(), Error> {
    let analysis = analyze(method, class_graph, settings)?;
    let table = analysis.stack_map_table()?;

    println!(
        "{}.{}{}",
        method.declaring_class,
        method.name,
        method.descriptor.render()
    );
    println!(
        "  max_stack = {}, max_locals = {}",
        analysis.max_stack(),
        analysis.max_locals()
    );
    for (id, insn) in method.instructions.iter() {
        let offset = method.instructions.offset(id)?;
        match analysis.frame_before(id) {
            Some(frame) => println!("  {:>5}: {:<28} {}", offset, insn.to_string(), frame),
            None => println!("  {:>5}: {:<28} (unreachable)", offset, insn.to_string()),
        }
    }

    println!("  frames:");
    for (offset, frame) in analysis.retained_frames() {
        println!("    @{} {}", offset, frame);
    }
    println!("  stack map table:");
    for entry in &table {
        println!("    {:?}", entry);
    }

    if hex {
        let mut constants = ClassConstants::default();
        let mut bytes = vec![];
        serialize_stack_map_table(&table, &mut constants, &mut bytes)?;
        let rendered: Vec<String> = bytes.iter().map(|byte| format!("{:02x}", byte)).collect();
        println!("  bytes: {}", rendered.join(" "));
        for (index, class) in constants.classes.iter().enumerate() {
            println!("    #{} = Class {}", index + 1, class.render());
        }
    }

    Ok(())
}
