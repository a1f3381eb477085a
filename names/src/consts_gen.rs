// Code generated by namesgen from names_data.csv. DO NOT EDIT.
#![allow(non_upper_case_globals)]
pub const AccessAnalyzer: &str = "accessanalyzer";
pub const AppAutoScaling: &str = "appautoscaling";
pub const Backup: &str = "backup";
pub const CloudWatch: &str = "cloudwatch";
pub const EC2: &str = "ec2";
pub const EFS: &str = "efs";
pub const ElastiCache: &str = "elasticache";
pub const IAM: &str = "iam";
pub const S3: &str = "s3";
pub const STS: &str = "sts";
