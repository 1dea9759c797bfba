use std::sync::Mutex;

use super::*;
use crate::codec::pcm::DEFAULT_SAMPLE_RATE;
use crate::foundation::error::MoshError;

/// Adds the first parameter of every `add` effect to each 8-bit sample.
#[derive(Default)]
struct AddingProcessor {
    jobs: Mutex<Vec<(AudioStream, AudioStream, Vec<String>)>>,
}

impl EffectProcessor for AddingProcessor {
    fn name(&self) -> &str {
        "adding"
    }

    fn check_available(&self) -> MoshResult<()> {
        Ok(())
    }

    fn apply(&self, job: &EffectJob<'_>) -> MoshResult<()> {
        self.jobs.lock().unwrap().push((
            job.input.clone(),
            job.output.clone(),
            job.chain.to_args(),
        ));
        let offset: u8 = job
            .chain
            .effects()
            .iter()
            .filter(|e| e.name == "add")
            .map(|e| e.params[0].parse::<u8>().unwrap())
            .fold(0u8, u8::wrapping_add);
        let bytes = std::fs::read(job.input.path()).unwrap();
        let out: Vec<u8> = bytes.iter().map(|b| b.wrapping_add(offset)).collect();
        std::fs::write(job.output.path(), out).unwrap();
        Ok(())
    }
}

struct FailingProcessor;

impl EffectProcessor for FailingProcessor {
    fn name(&self) -> &str {
        "failing"
    }

    fn check_available(&self) -> MoshResult<()> {
        Ok(())
    }

    fn apply(&self, _job: &EffectJob<'_>) -> MoshResult<()> {
        Err(MoshError::collaborator(
            "fake add 1",
            "exit status: 1",
            "fake FAIL add: bad parameter",
        ))
    }
}

#[test]
fn run_samples_applies_the_chain_to_a_raw_stream() {
    let dir = tempfile::tempdir().unwrap();
    let processor = AddingProcessor::default();
    let chain = EffectSpec::parse(["add", "3"]).unwrap();
    let runner = EffectChainRunner::new(&processor, &chain, dir.path());

    let samples = SampleBuffer::from_raw(vec![1, 2, 254], BitDepth::Eight, DEFAULT_SAMPLE_RATE);
    let out = runner.run_samples(samples, "video").unwrap();
    assert_eq!(out.as_bytes(), &[4, 5, 1]);

    let jobs = processor.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    let (input, output, args) = &jobs[0];
    assert!(matches!(
        input,
        AudioStream::Raw {
            bit_depth: BitDepth::Eight,
            sample_rate: DEFAULT_SAMPLE_RATE,
            ..
        }
    ));
    assert!(output.path().ends_with("video.out.raw"));
    assert_eq!(args, &vec!["add".to_string(), "3".to_string()]);
}

#[test]
fn run_track_processes_a_wav_stream() {
    let dir = tempfile::tempdir().unwrap();
    let track = dir.path().join("audio.wav");
    std::fs::write(&track, [10u8, 20]).unwrap();

    let processor = AddingProcessor::default();
    let chain = EffectSpec::parse(["add", "1"]).unwrap();
    let runner = EffectChainRunner::new(&processor, &chain, dir.path());
    let out = runner.run_track(&track).unwrap();

    assert_eq!(std::fs::read(&out).unwrap(), vec![11, 21]);
    let jobs = processor.jobs.lock().unwrap();
    assert!(matches!(jobs[0].0, AudioStream::Wav { .. }));
}

#[test]
fn collaborator_failure_propagates_with_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let chain = EffectSpec::parse(["add", "1"]).unwrap();
    let runner = EffectChainRunner::new(&FailingProcessor, &chain, dir.path());
    let samples = SampleBuffer::from_raw(vec![0; 4], BitDepth::Eight, DEFAULT_SAMPLE_RATE);

    let err = runner.run_samples(samples, "video").unwrap_err();
    assert!(err.to_string().contains("bad parameter"), "{err}");
}
